mod common;

use backoffice::domain::{ApiError, PageRequest};
use backoffice::models::requerimiento::{AccionRevision, Estado, RequerimientoItemDto};
use backoffice::services::requisition_service::RequisitionInput;
use backoffice::services::{RequisitionAction, ViewMode};
use common::{OWNER, app, claims, requerimiento_json};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APPROVE: &str = "requerimientos.aprobar";

async fn mount_detail(server: &MockServer, id: i64, estado: &str, creado_por: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/requerimientos/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(requerimiento_json(id, estado, creado_por)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn creator_can_send_a_draft_to_review() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &["requerimientos.crear"]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 12, "borrador", 5).await;

    Mock::given(method("POST"))
        .and(path("/requerimientos/12/enviar-revision"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "estado": "revision" })))
        .expect(1)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(12).await.unwrap();
    assert_eq!(detail.requerimiento.estado, Estado::Borrador);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(
        service.available_actions(&detail.requerimiento),
        vec![
            RequisitionAction::Edit,
            RequisitionAction::Delete,
            RequisitionAction::SendToReview
        ]
    );
    assert_eq!(service.view_mode(&detail.requerimiento), ViewMode::Draft);

    service.send_to_review(&detail.requerimiento).await.unwrap();
}

#[tokio::test]
async fn someone_elses_draft_is_left_to_the_backend() {
    let server = MockServer::start().await;
    let me = claims(6, "Almacenero", &["requerimientos.crear"]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 12, "borrador", 5).await;

    Mock::given(method("POST"))
        .and(path("/requerimientos/12/enviar-revision"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "estado": "revision" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/requerimientos/12"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "message": "Solo el creador puede eliminar el requerimiento"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(12).await.unwrap();
    assert_eq!(service.view_mode(&detail.requerimiento), ViewMode::Draft);

    service.send_to_review(&detail.requerimiento).await.unwrap();
    let err = service.delete(&detail.requerimiento).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::PermissionDenied {
            message: "Solo el creador puede eliminar el requerimiento".to_string(),
            missing: vec![],
        }
    );
}

#[tokio::test]
async fn signed_out_operator_is_offered_nothing() {
    let server = MockServer::start().await;
    let me = claims(6, "Almacenero", &[]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 12, "borrador", 5).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(12).await.unwrap();
    app.ctx.session.logout().unwrap();

    assert!(service.available_actions(&detail.requerimiento).is_empty());
    let err = service.send_to_review(&detail.requerimiento).await.unwrap_err();
    assert!(matches!(err, ApiError::ActionUnavailable(_)));
}

#[tokio::test]
async fn owner_acts_on_any_draft() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 12, "borrador", 5).await;

    Mock::given(method("DELETE"))
        .and(path("/requerimientos/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(12).await.unwrap();
    service.delete(&detail.requerimiento).await.unwrap();
}

#[tokio::test]
async fn approver_reviews_with_amended_items() {
    let server = MockServer::start().await;
    let me = claims(7, "Jefe de compras", &[APPROVE]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 20, "revision", 5).await;

    Mock::given(method("PATCH"))
        .and(path("/requerimientos/20/revisar"))
        .and(body_json(json!({
            "accion": "aprobar",
            "observaciones": "Comprar la mitad",
            "items": [{
                "productoId": 3,
                "unidadMedidaId": 1,
                "cantidad": 1.0,
                "precioUnitarioEstimado": 4.5,
                "precioTotalEstimado": 4.5
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "estado": "aprobado" })))
        .expect(1)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(20).await.unwrap();
    assert_eq!(service.view_mode(&detail.requerimiento), ViewMode::Review);

    let mut items = detail.item_dtos();
    items[0].cantidad = 1.0;
    items[0].precio_total_estimado = Some(4.5);
    let input = RequisitionInput {
        observaciones: Some("Comprar la mitad".into()),
        items: Some(items),
    };
    service
        .review(&detail.requerimiento, AccionRevision::Aprobar, input)
        .await
        .unwrap();
}

#[tokio::test]
async fn review_without_approval_permission_is_refused_locally() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &["requerimientos.crear"]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 20, "revision", 5).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(20).await.unwrap();
    let err = service
        .review(&detail.requerimiento, AccionRevision::Rechazar, RequisitionInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ActionUnavailable(_)));
}

#[tokio::test]
async fn invalid_amended_items_are_caught_before_the_patch() {
    let server = MockServer::start().await;
    let me = claims(7, "Jefe de compras", &[APPROVE]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 20, "revision", 5).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(20).await.unwrap();
    let input = RequisitionInput {
        observaciones: None,
        items: Some(vec![RequerimientoItemDto {
            producto_id: 3,
            unidad_medida_id: 1,
            cantidad: 0.0,
            ..Default::default()
        }]),
    };
    let err = service
        .review(&detail.requerimiento, AccionRevision::Guardar, input)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Fila 1: Cantidad inválida.");
}

#[tokio::test]
async fn terminal_states_offer_nothing() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 30, "aprobado", 1).await;

    let service = app.ctx.requisitions();
    let detail = service.get(30).await.unwrap();
    assert!(service.available_actions(&detail.requerimiento).is_empty());
    assert_eq!(service.view_mode(&detail.requerimiento), ViewMode::ReadOnly);
}

#[tokio::test]
async fn backend_rejection_of_a_transition_is_surfaced() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &[]);
    let app = app(&server, Some(&me));
    mount_detail(&server, 12, "borrador", 5).await;

    Mock::given(method("POST"))
        .and(path("/requerimientos/12/enviar-revision"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "message": "El requerimiento no tiene items"
        })))
        .mount(&server)
        .await;

    let service = app.ctx.requisitions();
    let detail = service.get(12).await.unwrap();
    let err = service.send_to_review(&detail.requerimiento).await.unwrap_err();
    assert_eq!(err.user_message(), "El requerimiento no tiene items");
}

#[tokio::test]
async fn listing_by_status_sends_the_filter() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));

    Mock::given(method("GET"))
        .and(path("/requerimientos"))
        .and(query_param("estado", "revision"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [requerimiento_json(20, "revision", 5)],
            "meta": { "total": 1, "page": 1, "limit": 10, "lastPage": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = app
        .ctx
        .requisitions()
        .list_by_estado(&Estado::Revision, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].estado, Estado::Revision);
}
