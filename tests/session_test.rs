mod common;

use backoffice::domain::{ApiError, PageRequest};
use backoffice::infrastructure::{StoredSession, TokenStore};
use backoffice::models::{Categorias, Usuarios};
use backoffice::services::{NoticeLevel, PagedList};
use common::{OWNER, app, claims, token_for};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn usuario_sesion(id: i64, rol: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": format!("user{}@example.com", id),
        "nombreCompleto": "Ana Torres",
        "rol": rol,
        "empresa": { "subdominio": "demo", "schema": "empresa_demo" },
        "locales": [{ "id": 1, "nombre": "Sede Centro", "codigo": "CEN-01", "tieneMesas": true }],
        "permisos": []
    })
}

#[tokio::test]
async fn login_stores_the_token_and_authenticates_later_calls() {
    let server = MockServer::start().await;
    let app = app(&server, None);
    let issued = claims(5, "Almacenero", &["requerimientos.crear"]);
    let token = token_for(&issued);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "ana@example.com", "password": "secreto" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": token,
            "usuario": usuario_sesion(5, "Almacenero")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorias"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!app.ctx.session.is_authenticated());
    let identity = app
        .ctx
        .session
        .login(" ana@example.com ", "secreto")
        .await
        .unwrap();

    assert_eq!(identity.display_name(), "Ana Torres");
    assert_eq!(identity.claims.sub, 5);
    assert!(app.ctx.session.has_permission("requerimientos.crear"));
    assert!(!app.ctx.session.has_permission("requerimientos.aprobar"));

    let stored = app.store.load().unwrap().expect("session should be persisted");
    assert_eq!(stored.access_token, token);
    assert_eq!(stored.user_name.as_deref(), Some("Ana Torres"));

    app.ctx
        .manager::<Categorias>()
        .list(&PageRequest::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_credentials_are_a_form_error() {
    let server = MockServer::start().await;
    let app = app(&server, None);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "message": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let err = app
        .ctx
        .session
        .login("ana@example.com", "incorrecta")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Credenciales inválidas");
    assert!(!app.ctx.session.is_authenticated());
}

#[tokio::test]
async fn blank_credentials_never_reach_the_backend() {
    let server = MockServer::start().await;
    let app = app(&server, None);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = app.ctx.session.login("", "  ").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Validation {
            messages: vec![
                "El correo es obligatorio.".to_string(),
                "La contraseña es obligatoria.".to_string()
            ]
        }
    );
}

#[tokio::test]
async fn expired_stored_token_is_discarded_on_start() {
    let server = MockServer::start().await;
    let mut old = claims(5, "Almacenero", &[]);
    old.exp = Some(chrono::Utc::now().timestamp() - 60);

    let store = std::sync::Arc::new(backoffice::infrastructure::MemoryTokenStore::with_session(
        StoredSession {
            access_token: token_for(&old),
            user_name: None,
        },
    ));
    let ctx = backoffice::AppContext::init(
        backoffice::Config::new(server.uri()),
        store.clone(),
        std::sync::Arc::new(backoffice::services::RecordingNotifier::new()),
    )
    .unwrap();

    assert!(!ctx.session.is_authenticated());
    assert!(!ctx.client.has_token());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn unauthorized_response_logs_the_operator_out() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &[]);
    let app = app(&server, Some(&me));
    assert!(app.ctx.session.is_authenticated());

    Mock::given(method("GET"))
        .and(path("/categorias"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "message": "Token expirado"
        })))
        .mount(&server)
        .await;

    let err = app
        .ctx
        .manager::<Categorias>()
        .list(&PageRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_session_expired());

    app.ctx.handle_error(&err);

    assert!(!app.ctx.session.is_authenticated());
    assert!(!app.ctx.client.has_token());
    assert_eq!(app.store.load().unwrap(), None);

    let notices = app.notices.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[1].level, NoticeLevel::Warning);
    assert_eq!(notices[1].message, "Redirigiendo al inicio de sesión");
}

#[tokio::test]
async fn forbidden_response_lists_the_missing_permissions() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &[]);
    let app = app(&server, Some(&me));

    Mock::given(method("GET"))
        .and(path("/usuarios"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "message": "Forbidden resource",
            "permisosFaltantes": ["usuarios.ver"]
        })))
        .mount(&server)
        .await;

    let err = app
        .ctx
        .manager::<Usuarios>()
        .list(&PageRequest::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::PermissionDenied {
            message: "Forbidden resource".to_string(),
            missing: vec!["usuarios.ver".to_string()],
        }
    );
    assert_eq!(
        err.user_message(),
        "Acceso denegado. Te faltan los permisos: usuarios.ver"
    );
    // A 403 does not end the session
    assert!(!app.ctx.expire_if_needed(&err));
    assert!(app.ctx.session.is_authenticated());
}

#[tokio::test]
async fn failed_list_refresh_shows_a_notice_and_empties_the_table() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));

    Mock::given(method("GET"))
        .and(path("/categorias"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusCode": 500,
            "message": "Error interno"
        })))
        .mount(&server)
        .await;

    let mut list = PagedList::new(
        app.ctx.manager::<Categorias>(),
        app.ctx.notifier.clone(),
        10,
    );
    assert!(!list.refresh().await);

    assert!(list.rows().is_empty());
    assert_eq!(list.total(), 0);
    assert_eq!(app.notices.errors(), vec!["Error interno".to_string()]);
    assert!(matches!(list.last_error(), Some(ApiError::Server { status: 500, .. })));
}

#[tokio::test]
async fn refresh_picks_up_new_permissions() {
    let server = MockServer::start().await;
    let before = claims(5, "Almacenero", &[]);
    let app = app(&server, Some(&before));
    assert!(!app.ctx.session.has_permission("requerimientos.aprobar"));

    let after = claims(5, "Almacenero", &["requerimientos.aprobar"]);
    Mock::given(method("POST"))
        .and(path("/auth/me/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": token_for(&after)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = app.ctx.session.refresh().await.unwrap();
    assert_eq!(identity.user_name.as_deref(), Some("Operador de prueba"));
    assert!(app.ctx.session.has_permission("requerimientos.aprobar"));
    assert!(app.ctx.session.require("requerimientos.aprobar").is_ok());
}

#[tokio::test]
async fn owner_passes_every_permission_check() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));

    assert!(app.ctx.session.is_owner());
    assert!(app.ctx.session.has_permission("usuarios.crear"));
    assert!(app.ctx.session.require("requerimientos.aprobar").is_ok());
}

#[tokio::test]
async fn missing_permission_is_named() {
    let server = MockServer::start().await;
    let me = claims(5, "Cajero", &["ventas.crear"]);
    let app = app(&server, Some(&me));

    let err = app.ctx.session.require("usuarios.crear").unwrap_err();
    assert_eq!(
        err,
        ApiError::PermissionDenied {
            message: String::new(),
            missing: vec!["usuarios.crear".to_string()],
        }
    );
}

#[tokio::test]
async fn menu_hides_entries_the_operator_cannot_open() {
    let server = MockServer::start().await;
    let me = claims(5, "Almacenero", &["productos.ver"]);
    let app = app(&server, Some(&me));

    Mock::given(method("GET"))
        .and(path("/auth/me/menu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 2, "codigo": "inventario", "titulo": "Inventario", "icono": "box",
                "ruta": null, "permiso_requerido": null, "orden": 2,
                "hijos": [
                    { "id": 21, "codigo": "productos", "titulo": "Productos", "ruta": "/productos",
                      "permiso_requerido": "productos.ver", "orden": 1, "hijos": [] },
                    { "id": 22, "codigo": "entradas", "titulo": "Entradas", "ruta": "/entradas",
                      "permiso_requerido": "entradas.ver", "orden": 2, "hijos": [] }
                ]
            },
            {
                "id": 3, "codigo": "config", "titulo": "Configuración", "icono": "gear",
                "ruta": null, "permiso_requerido": null, "orden": 3,
                "hijos": [
                    { "id": 31, "codigo": "roles", "titulo": "Roles", "ruta": "/roles",
                      "permiso_requerido": "roles.ver", "orden": 1, "hijos": [] }
                ]
            },
            {
                "id": 1, "codigo": "inicio", "titulo": "Inicio", "icono": "home",
                "ruta": "/dashboard", "permiso_requerido": null, "orden": 1, "hijos": []
            }
        ])))
        .mount(&server)
        .await;

    let menu = app.ctx.session.menu().await.unwrap();
    let titles: Vec<&str> = menu.iter().map(|m| m.titulo.as_str()).collect();
    assert_eq!(titles, vec!["Inicio", "Inventario"]);
    assert_eq!(menu[1].hijos.len(), 1);
    assert_eq!(menu[1].hijos[0].titulo, "Productos");
}

#[tokio::test]
async fn role_menu_matrix_is_built_from_the_callers_tree() {
    let server = MockServer::start().await;
    let me = claims(1, OWNER, &[]);
    let app = app(&server, Some(&me));

    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 4, "nombre": "Almacenero", "esSistema": false, "empresaId": 1,
            "rolPermisos": [{
                "activo": true,
                "permiso": { "id": 11, "codigo": "productos.ver", "nombre": "Ver productos",
                             "modulo": "productos", "descripcion": null }
            }]
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me/menu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 2, "codigo": "inventario", "titulo": "Inventario", "ruta": null,
                "permiso_requerido": null, "orden": 2,
                "hijos": [
                    { "id": 21, "codigo": "productos", "titulo": "Productos", "ruta": "/productos",
                      "permiso_requerido": "productos.ver", "orden": 1, "hijos": [] },
                    { "id": 22, "codigo": "entradas", "titulo": "Entradas", "ruta": "/entradas",
                      "permiso_requerido": "inventario_central.entradas", "orden": 2, "hijos": [] }
                ]
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = app.ctx.roles().role_menu_matrix(4).await.unwrap();
    let marks: Vec<(&str, usize, bool)> = rows
        .iter()
        .map(|r| (r.titulo.as_str(), r.depth, r.visible))
        .collect();
    assert_eq!(
        marks,
        vec![
            ("Inventario", 0, true),
            ("Productos", 1, true),
            ("Entradas", 1, false)
        ]
    );
}
