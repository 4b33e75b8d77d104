pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::flash::{self, Flash};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::root)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::register_page)
        .service(auth::register)
        .service(tasks::dashboard)
        .service(tasks::add_task_page)
        .service(tasks::add_task)
        .service(tasks::delete_task)
        .service(tasks::toggle_task);
}

/// Builds the payload handed to the rendering collaborator: the view name,
/// the view's own data, and the pending flash message if any. Consuming a
/// flash clears its cookie.
pub(crate) fn render(req: &HttpRequest, view: &str, mut data: serde_json::Value) -> HttpResponse {
    let flash = flash::take(req);
    if let serde_json::Value::Object(map) = &mut data {
        map.insert("view".to_string(), json!(view));
        map.insert(
            "flash".to_string(),
            flash
                .map(Flash::payload)
                .unwrap_or(serde_json::Value::Null),
        );
    }

    let mut resp = HttpResponse::Ok();
    if flash.is_some() {
        resp.cookie(flash::clear_cookie());
    }
    resp.json(data)
}
