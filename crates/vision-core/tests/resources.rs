//! Resource operations: request shapes and response/error mapping.

mod common;

use common::{client, header, logged_in_client};
use reqwest::Method;
use vision_core::api::{ApiError, ApiRequest, FilePart, RequestBody};
use vision_core::models::{
    AppointmentFilters, NewAppointment, PropertyFilters, PropertyForm, Role, UserForm, IMAGES_FIELD,
};

#[tokio::test]
async fn test_list_properties_sends_only_given_filters() {
    let client = client();
    client.transport().respond(
        200,
        r#"{"success":true,"count":1,"data":[{"_id":"p1","title":"Casa","location":"Downtown"}]}"#,
    );

    let filters = PropertyFilters::from_search("Downtown", "", "");
    let response = client.list_properties(&filters).await.unwrap();
    let properties = response.into_data().unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].location, "Downtown");

    let request = client.transport().last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url.path(), "/api/properties");
    assert_eq!(request.url.query(), Some("location=Downtown"));
}

#[tokio::test]
async fn test_list_properties_without_filters_has_no_query() {
    let client = client();
    client.list_properties(&PropertyFilters::default()).await.unwrap();
    assert_eq!(client.transport().last().url.query(), None);
}

#[tokio::test]
async fn test_create_property_uses_multipart() {
    let client = logged_in_client("abc");
    client
        .transport()
        .respond(201, r#"{"success":true,"data":{"_id":"p2","title":"Apartamento"}}"#);

    let form = PropertyForm {
        title: Some("Apartamento".into()),
        price: Some(320000.0),
        ..Default::default()
    }
    .with_image(FilePart::new("sala.jpg", "image/jpeg", vec![0xff, 0xd8]));

    let created = client.create_property(&form).await.unwrap().into_data().unwrap();
    assert_eq!(created.id, "p2");

    let request = client.transport().last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(header(&request, "authorization"), Some("Bearer abc"));
    assert_eq!(header(&request, "content-type"), None);
    match &request.body {
        RequestBody::Multipart(form) => {
            assert_eq!(form.file_count(IMAGES_FIELD), 1);
            assert_eq!(form.text_value("title"), Some("Apartamento"));
            assert_eq!(form.text_value("price"), Some("320000"));
        }
        other => panic!("expected multipart body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_caller_content_type_dropped_on_multipart() {
    let client = logged_in_client("abc");
    let request = ApiRequest::post("/properties")
        .multipart(PropertyForm::active_only(true).to_multipart())
        .header("Content-Type", "application/json")
        .header("X-Request-Source", "admin");
    let _: serde_json::Value = client.request(request).await.unwrap();

    let sent = client.transport().last();
    assert_eq!(header(&sent, "content-type"), None);
    assert_eq!(header(&sent, "x-request-source"), Some("admin"));
}

#[tokio::test]
async fn test_set_property_active_sends_only_flag() {
    let client = logged_in_client("abc");
    client.set_property_active("p1", false).await.unwrap();

    let request = client.transport().last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.url.path(), "/api/properties/p1");
    match &request.body {
        RequestBody::Multipart(form) => {
            assert_eq!(form.text_fields().len(), 1);
            assert_eq!(form.text_value("active"), Some("false"));
        }
        other => panic!("expected multipart body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_id_is_rejected_before_sending() {
    let client = logged_in_client("abc");
    let err = client.delete_property("../users").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    let err = client.get_user("").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    let err = client.delete_property("..").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    let err = client.get_user(".").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    let err = client.update_appointment_status("..", "contacted").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_bad_image_content_type_is_rejected_before_sending() {
    let client = logged_in_client("abc");
    let form = PropertyForm {
        title: Some("Casa".to_string()),
        ..Default::default()
    }
    .with_image(FilePart::new("a.jpg", "not a mime", b"JPEG".to_vec()));

    let err = client.create_property(&form).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)), "got {:?}", err);
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_backend_message_surfaces_verbatim() {
    let client = logged_in_client("abc");
    client
        .transport()
        .respond(400, r#"{"success":false,"message":"Invalid"}"#);
    let err = client.delete_property("p1").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid");
    assert_eq!(err.status(), Some(400));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_error_without_message_is_generic() {
    let client = logged_in_client("abc");
    client.transport().respond(500, "Internal Server Error");
    let err = client.list_brokers().await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed");
}

#[tokio::test]
async fn test_network_failure_maps_to_network_error() {
    let client = logged_in_client("abc");
    client.transport().fail("connection refused");
    let err = client.list_appointments(&AppointmentFilters::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().contains("connection refused"));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let client = client();
    client.transport().respond(200, "<html>oops</html>");
    let err = client.featured_properties().await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_empty_body_decodes_as_empty_object() {
    let client = logged_in_client("abc");
    client.transport().respond(204, "");
    let response = client.delete_appointment("l1").await.unwrap();
    assert!(response.success);
    assert!(response.data.is_none());
}

#[tokio::test]
async fn test_user_crud_requests() {
    let client = logged_in_client("abc");

    let form = UserForm {
        name: Some("Bia".into()),
        username: Some("bia".into()),
        role: Some(Role::Broker),
        ..Default::default()
    }
    .with_password(Some(String::new()));
    client.update_user("u2", &form).await.unwrap();

    let request = client.transport().last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.url.path(), "/api/users/u2");
    assert_eq!(header(&request, "content-type"), Some("application/json"));
    match &request.body {
        RequestBody::Json(body) => {
            assert_eq!(body["role"], "broker");
            assert!(body.get("password").is_none());
            assert!(body.get("email").is_none());
        }
        other => panic!("expected JSON body, got {:?}", other),
    }

    client.list_brokers().await.unwrap();
    assert_eq!(client.transport().last().url.path(), "/api/users/brokers");

    client.delete_user("u2").await.unwrap();
    let request = client.transport().last();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.body, RequestBody::Empty);
}

#[tokio::test]
async fn test_lead_capture_is_public() {
    let client = logged_in_client("abc");
    client
        .transport()
        .respond(201, r#"{"success":true,"data":{"_id":"l1","propertyId":"p1","clientName":"Ana","clientPhone":"34999990000"}}"#);

    let lead = NewAppointment {
        property_id: "p1".into(),
        client_name: "Ana".into(),
        client_phone: "34999990000".into(),
        ..Default::default()
    };
    let created = client.create_appointment(&lead).await.unwrap().into_data().unwrap();
    assert_eq!(created.client_name, "Ana");

    let request = client.transport().last();
    assert_eq!(request.url.path(), "/api/appointments");
    assert_eq!(header(&request, "authorization"), None);
}

#[tokio::test]
async fn test_lead_status_update_and_filters() {
    let client = logged_in_client("abc");

    client.update_appointment_status("l1", "contacted").await.unwrap();
    let request = client.transport().last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.url.path(), "/api/appointments/l1");
    assert_eq!(request.body, RequestBody::Json(serde_json::json!({"status": "contacted"})));

    let filters = AppointmentFilters {
        status: Some("pending".into()),
        property_id: Some("p1".into()),
    };
    client.list_appointments(&filters).await.unwrap();
    let request = client.transport().last();
    assert_eq!(request.url.query(), Some("status=pending&propertyId=p1"));
    assert_eq!(header(&request, "authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn test_concurrent_requests_share_session() {
    let client = logged_in_client("abc");
    client
        .transport()
        .respond(200, r#"{"success":true,"data":[{"_id":"p1","title":"A"},{"_id":"p2","title":"B","active":false}]}"#);
    client
        .transport()
        .respond(200, r#"{"success":true,"data":[{"_id":"l1","clientName":"Ana"}]}"#);

    let property_filters = PropertyFilters::default();
    let appointment_filters = AppointmentFilters::default();
    let (properties, leads) = futures::join!(
        client.list_properties(&property_filters),
        client.list_appointments(&appointment_filters),
    );

    assert!(properties.is_ok());
    assert!(leads.is_ok());
    let requests = client.transport().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .any(|r| r.url.path() == "/api/appointments" && header(r, "authorization") == Some("Bearer abc")));
}
