// foodnest/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{account_handlers, order_handlers, product_handlers};

// Simple health check; a real deployment might probe DB connectivity here.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1") // Base path for API version 1
      .route("/health", web::get().to(health_check_handler))
      // Account / authentication routes
      .service(
        web::scope("/auth/users")
          .route("/register", web::post().to(account_handlers::register_handler))
          .route("/login", web::post().to(account_handlers::login_handler))
          .route("", web::get().to(account_handlers::list_users_handler))
          .route("/{id}", web::get().to(account_handlers::get_user_handler))
          .route("/{id}", web::patch().to(account_handlers::update_user_handler))
          .route("/{id}/role", web::patch().to(account_handlers::update_user_role_handler))
          .route("/{id}", web::delete().to(account_handlers::delete_user_handler)),
      )
      // Product routes
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{id}", web::get().to(product_handlers::get_product_handler))
          .route("/{id}", web::patch().to(product_handlers::update_product_handler)),
      )
      // Order routes
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::patch().to(order_handlers::update_order_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler))
          .route("/{id}", web::delete().to(order_handlers::delete_order_handler)),
      ),
  );
}
