use vision_core::models::{Appointment, DashboardStats, Property, User};
use vision_core::utils::{
    format_local, format_optional, format_phone, format_price, image_url, truncate_string,
};

/// Placeholder size for listing cards
const CARD_IMAGE_SIZE: &str = "400x280";

/// Placeholder size for the detail page gallery
const DETAIL_IMAGE_SIZE: &str = "800x500";

/// Widest a table cell may grow before it is truncated
const MAX_CELL_WIDTH: usize = 40;

const EMPTY: &str = "-";

// ============================================================================
// Tables
// ============================================================================

/// Plain text table with left-aligned columns sized to their widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate_string(c, MAX_CELL_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(table_line(headers.iter().copied(), &widths));
    out.push(table_line(rule.iter().map(String::as_str), &widths));
    for row in &cells {
        out.push(table_line(row.iter().map(String::as_str), &widths));
    }
    out.join("\n")
}

fn table_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

// ============================================================================
// Labels
// ============================================================================

pub fn property_type_label(kind: &str) -> String {
    match kind.trim().to_lowercase().as_str() {
        "venda" | "sale" => "Venda".to_string(),
        "aluguel" | "rent" => "Aluguel".to_string(),
        "" => EMPTY.to_string(),
        _ => {
            let mut chars = kind.trim().chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => EMPTY.to_string(),
            }
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "sim"
    } else {
        "não"
    }
}

fn plural(count: u32, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

fn format_area(area: f64) -> String {
    if area.fract() == 0.0 {
        format!("{:.0} m²", area)
    } else {
        format!("{:.1} m²", area).replace('.', ",")
    }
}

// ============================================================================
// Public pages
// ============================================================================

/// Listing card as shown on the home and search pages.
pub fn property_card(property: &Property, asset_base: &str) -> String {
    let features = [
        plural(property.bedrooms, "quarto", "quartos"),
        plural(property.bathrooms, "banheiro", "banheiros"),
        plural(property.garages, "vaga", "vagas"),
    ]
    .join(" · ");

    format!(
        "{title}  [{kind}]\n  {location}\n  {features}\n  {price}\n  id: {id}\n  foto: {image}",
        title = property.title,
        kind = property_type_label(&property.property_type),
        location = format_optional(Some(property.location.as_str()), EMPTY),
        features = features,
        price = format_price(property.price),
        id = property.id,
        image = image_url(property.main_image(), asset_base, CARD_IMAGE_SIZE),
    )
}

pub fn property_cards(properties: &[Property], asset_base: &str, empty_message: &str) -> String {
    if properties.is_empty() {
        return empty_message.to_string();
    }
    properties
        .iter()
        .map(|p| property_card(p, asset_base))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full listing page: every field and every photo.
pub fn property_detail(property: &Property, asset_base: &str) -> String {
    let mut lines = vec![
        property.title.clone(),
        format!("{}  ·  {}", property_type_label(&property.property_type), format_price(property.price)),
        format!("Localização: {}", format_optional(Some(property.location.as_str()), EMPTY)),
        format!("Área: {}", format_area(property.area)),
        format!("Quartos: {}", property.bedrooms),
        format!("Banheiros: {}", property.bathrooms),
        format!("Vagas: {}", property.garages),
    ];

    if let Some(created) = &property.created_at {
        lines.push(format!("Publicado em: {}", format_local(created)));
    }

    if !property.description.trim().is_empty() {
        lines.push(String::new());
        lines.push(property.description.trim().to_string());
    }

    lines.push(String::new());
    if property.images.is_empty() {
        lines.push(format!("Fotos: {}", image_url(None, asset_base, DETAIL_IMAGE_SIZE)));
    } else {
        lines.push(format!("Fotos ({}):", property.photo_count()));
        for image in &property.images {
            lines.push(format!("  {}", image_url(Some(image), asset_base, DETAIL_IMAGE_SIZE)));
        }
    }

    lines.join("\n")
}

// ============================================================================
// Admin panel
// ============================================================================

pub fn admin_property_table(properties: &[&Property]) -> String {
    if properties.is_empty() {
        return "Nenhum imóvel cadastrado.".to_string();
    }
    let rows: Vec<Vec<String>> = properties
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.title.clone(),
                format_optional(Some(p.location.as_str()), EMPTY),
                format_price(p.price),
                property_type_label(&p.property_type),
                yes_no(p.active).to_string(),
            ]
        })
        .collect();
    table(&["ID", "Título", "Localização", "Preço", "Tipo", "Ativo"], &rows)
}

/// One lead with a ready-to-click WhatsApp link.
pub fn lead_card(lead: &Appointment) -> String {
    let mut lines = vec![
        format!("{}  ({})", lead.client_name, lead.id),
        format!("  Interesse em: {}", format_optional(Some(lead.property_title.as_str()), EMPTY)),
        format!("  Telefone: {}", format_phone(&lead.client_phone)),
    ];
    if let Some(email) = lead.email() {
        lines.push(format!("  E-mail: {}", email));
    }
    if let Some(created) = &lead.created_at {
        lines.push(format!("  Data: {}", format_local(created)));
    }
    if let Some(status) = lead.status.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("  Status: {}", status));
    }
    if let Some(message) = lead.message() {
        lines.push(format!("  Mensagem: {}", message.trim()));
    }
    if let Some(link) = lead.contact_link() {
        lines.push(format!("  WhatsApp: {}", link));
    }
    lines.join("\n")
}

pub fn leads(leads: &[Appointment]) -> String {
    if leads.is_empty() {
        return "Nenhum cadastro.".to_string();
    }
    leads.iter().map(lead_card).collect::<Vec<_>>().join("\n\n")
}

/// Account table. The last column says whether the panel would allow a delete.
pub fn users_table(users: &[User]) -> String {
    if users.is_empty() {
        return "Nenhum usuário.".to_string();
    }
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.display_name().to_string(),
                u.username.clone(),
                format_optional(Some(u.email.as_str()), EMPTY),
                u.role.to_string(),
                u.created_at.as_ref().map(format_local).unwrap_or_else(|| EMPTY.to_string()),
                yes_no(u.can_delete(users)).to_string(),
            ]
        })
        .collect();
    table(&["ID", "Nome", "Usuário", "E-mail", "Perfil", "Criado em", "Removível"], &rows)
}

pub fn user_profile(user: &User) -> String {
    let mut lines = vec![
        format!("{} ({})", user.display_name(), user.role),
        format!("Usuário: {}", format_optional(Some(user.username.as_str()), EMPTY)),
        format!("E-mail: {}", format_optional(Some(user.email.as_str()), EMPTY)),
    ];
    if !user.id.is_empty() {
        lines.push(format!("ID: {}", user.id));
    }
    lines.join("\n")
}

pub fn dashboard(user: &User, stats: &DashboardStats) -> String {
    let mut lines = vec![
        format!("Olá, {}", user.display_name()),
        String::new(),
        format!("Imóveis cadastrados: {}", stats.total_properties),
        format!("Imóveis ativos:      {}", stats.active_properties),
    ];
    if let Some(total) = stats.total_leads {
        lines.push(format!("Cadastros (leads):   {}", total));
    }
    lines.join("\n")
}
