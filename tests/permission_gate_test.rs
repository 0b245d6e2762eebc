mod common;

use backoffice::domain::ApiError;
use backoffice::models::entrada::{CrearEntradaDto, EntradaItemDto};
use backoffice::models::proveedor::{CrearProveedorDto, EditarProveedorDto};
use backoffice::models::{Categorias, Proveedores};
use backoffice::services::{EntityForm, SubmitOutcome};
use common::{OWNER, app, claims};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn proveedor_json(id: i64) -> serde_json::Value {
    json!({
        "id": id, "ruc": "20123456789", "razon_social": "Molinos del Sur SAC",
        "nombre_comercial": null, "direccion": null, "telefono": null, "email": null,
        "contacto_nombre": null, "contacto_telefono": null, "activo": true
    })
}

fn nuevo_proveedor() -> CrearProveedorDto {
    CrearProveedorDto {
        ruc: "20123456789".into(),
        razon_social: "Molinos del Sur SAC".into(),
        ..Default::default()
    }
}

async fn refuse_every_write(server: &MockServer) {
    for verb in ["POST", "PATCH", "DELETE"] {
        Mock::given(method(verb))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn supplier_writes_need_their_permission_codes() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &["proveedores.ver"]);
    let app = app(&server, Some(&me));
    refuse_every_write(&server).await;

    let mut page = app.ctx.crud::<Proveedores>();
    let outcome = page
        .submit(&EntityForm::<Proveedores>::create(nuevo_proveedor()))
        .await;
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected(ApiError::PermissionDenied {
            message: String::new(),
            missing: vec!["proveedores.crear".to_string()],
        })
    );
    // Shown in the form, not as a notice
    assert!(app.notices.notices().is_empty());

    let edit = EntityForm::<Proveedores>::edit(
        2,
        EditarProveedorDto {
            telefono: Some("555-0101".into()),
            ..Default::default()
        },
    );
    assert_eq!(
        page.submit(&edit).await.message().as_deref(),
        Some("Acceso denegado. Te faltan los permisos: proveedores.editar")
    );

    let err = page.delete(2).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::PermissionDenied { ref missing, .. }
            if missing == &vec!["proveedores.eliminar".to_string()]
    ));
}

#[tokio::test]
async fn holder_of_the_code_creates_a_supplier() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &["proveedores.crear"]);
    let app = app(&server, Some(&me));

    Mock::given(method("POST"))
        .and(path("/proveedores"))
        .respond_with(ResponseTemplate::new(201).set_body_json(proveedor_json(2)))
        .expect(1)
        .mount(&server)
        .await;

    let created = app
        .ctx
        .manager::<Proveedores>()
        .create(&nuevo_proveedor())
        .await
        .unwrap();
    assert_eq!(created.id, 2);

    // Only the create code was granted
    let err = app.ctx.manager::<Proveedores>().delete(2).await.unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { .. }));
}

#[tokio::test]
async fn owner_bypasses_the_write_gate() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));

    Mock::given(method("DELETE"))
        .and(path("/proveedores/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    app.ctx.manager::<Proveedores>().delete(2).await.unwrap();
}

#[tokio::test]
async fn intakes_need_the_central_inventory_code() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &["requerimientos.crear"]);
    let app = app(&server, Some(&me));
    refuse_every_write(&server).await;

    let service = app.ctx.entradas();
    let draft = CrearEntradaDto::manual(vec![EntradaItemDto::new(3, 1, 3.0, 2.5)]);
    let err = service.create(&draft).await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Acceso denegado. Te faltan los permisos: inventario_central.entradas"
    );

    let err = service.anular(41).await.unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { .. }));
}

#[tokio::test]
async fn ungated_resources_go_straight_to_the_backend() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &[]);
    let app = app(&server, Some(&me));

    Mock::given(method("DELETE"))
        .and(path("/categorias/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    app.ctx.manager::<Categorias>().delete(4).await.unwrap();
}
