//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (front users)
//! GET  /api/auth/check             - Does an account exist for this email/phone
//! POST /api/auth/signup            - Create account, returns JWT pair
//! POST /api/auth/login             - Email/phone + password login
//! POST /api/auth/refresh           - Exchange refresh token for access token
//! POST /api/auth/send-otp          - Email a 6-digit OTP
//! POST /api/auth/verify-otp        - OTP login
//! POST /api/auth/forgot-password   - Start OTP password reset
//! POST /api/auth/reset-password    - Finish OTP password reset
//! GET  /api/auth/{id}              - Profile with wishlist ids
//! PUT  /api/auth/{id}              - Profile update
//!
//! # Catalog
//! POST /api/products               - Create product (auth)
//! GET  /api/products               - List with category populated
//! GET  /api/products/brochures     - Products shipping a brochure PDF
//! GET  /api/products/{id}          - Detail / PUT update / DELETE
//! GET  /api/products/{id}/share-link
//! GET  /api/products/category/{category_id}
//! GET  /api/products/brand/{brand}
//! PUT  /api/products/{id}/reviews  - Create-or-update the caller's review
//! GET  /api/products/{id}/reviews
//! CRUD /api/categories (+ subpage assignment/lookup)
//!
//! # Cart + wishlist
//! POST /api/cart                   - Add line (same product bumps quantity)
//! GET  /api/cart/{user_id}         - Lines with products populated
//! DELETE /api/cart/{id}
//! POST /api/cart/share             - Publish 7-day share snapshot
//! GET  /api/cart/share/{token}
//! POST|GET|DELETE /api/wishlist
//!
//! # Orders
//! POST /api/orders                 - Create (coupon applied server-side)
//! GET  /api/orders                 - All, newest first
//! GET  /api/orders/notifications   - Unseen orders (admin badge)
//! GET  /api/orders/events          - SSE stream of new-order notifications
//! GET|PATCH|DELETE /api/orders/{id}
//! PATCH /api/orders/{id}/seen
//! POST /api/orders/{id}/consignment - Book DTDC consignment (auth)
//! GET  /api/orders/user/{user_id}?page=&limit=
//!
//! # Coupons, reviews, analytics
//! CRUD /api/coupons + validate/mark-used/available/offers
//! DELETE /api/reviews/{id}         - Owner only
//! POST /api/analytics/snapshots, GET latest?range=, GET chart?filter=
//!
//! # Content
//! POST|GET|DELETE /api/ads (+ /{id})
//! CRUD /api/brochures, /api/essentials (+ card replace), /api/shelves
//! GET  /api/policies/{title} (+ /history, POST /versions)
//! POST|GET /api/consultations
//! POST|PUT|GET /api/addresses
//!
//! # Payments + shipping
//! POST /api/payments/initiate|response|cancelled|refund
//! GET  /api/payments?from=&to=&page=  /  /api/payments/{order_number}
//! POST /api/shipping/track
//! ```

pub mod addresses;
pub mod ads;
pub mod analytics;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod content;
pub mod coupons;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod shipping;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/check", get(auth::check))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/{id}", get(auth::get_profile).put(auth::update_profile))
}

/// Create the product routes router (including nested reviews).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::list))
        .route("/brochures", get(products::brochures))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/{id}/share-link", get(products::share_link))
        .route("/category/{category_id}", get(products::by_category))
        .route("/brand/{brand}", get(products::by_brand))
        .route(
            "/{id}/reviews",
            put(reviews::upsert).get(reviews::list_for_product),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(categories::create).get(categories::list))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/{id}/subpage", put(categories::set_subpage))
        .route("/subpage/{subpage_type}", get(categories::by_subpage))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::add))
        .route("/share", post(cart::share))
        .route("/share/{token}", get(cart::shared))
        .route("/{id}", get(cart::list).delete(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(wishlist::add).delete(wishlist::remove))
        .route("/{user_id}", get(wishlist::list))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/notifications", get(orders::notifications))
        .route("/events", get(orders::events))
        .route(
            "/{id}",
            get(orders::show)
                .patch(orders::update)
                .delete(orders::remove),
        )
        .route("/{id}/seen", patch(orders::mark_seen))
        .route("/{id}/consignment", post(shipping::create_consignment))
        .route("/user/{user_id}", get(orders::by_user))
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(coupons::create).get(coupons::list))
        .route("/validate", post(coupons::validate))
        .route("/mark-used", post(coupons::mark_used))
        .route("/available", get(coupons::available))
        .route("/offers", get(coupons::offers))
        .route("/{id}", put(coupons::update).delete(coupons::remove))
}

/// Create the analytics routes router.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/snapshots", post(analytics::take_snapshot))
        .route("/latest", get(analytics::latest))
        .route("/chart", get(analytics::chart))
}

/// Create the content routes router (ads, brochures, essentials, shelves,
/// policies, consultations).
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/ads", post(ads::create).get(ads::list))
        .route("/ads/{id}", get(ads::show).delete(ads::remove))
        .route(
            "/brochures",
            post(content::create_brochure).get(content::list_brochures),
        )
        .route(
            "/brochures/{id}",
            get(content::show_brochure)
                .put(content::update_brochure)
                .delete(content::remove_brochure),
        )
        .route(
            "/essentials",
            post(content::create_essentials).get(content::list_essentials),
        )
        .route(
            "/essentials/{id}",
            get(content::show_essentials)
                .put(content::update_essentials)
                .delete(content::remove_essentials),
        )
        .route(
            "/essentials/{id}/cards/{card_id}",
            put(content::replace_essentials_card),
        )
        .route(
            "/shelves",
            post(content::create_shelf).get(content::list_shelves),
        )
        .route(
            "/shelves/{id}",
            put(content::update_shelf).delete(content::remove_shelf),
        )
        .route("/policies/{title}", get(content::policy_latest))
        .route("/policies/{title}/history", get(content::policy_history))
        .route(
            "/policies/{title}/versions",
            post(content::policy_add_version),
        )
        .route(
            "/consultations",
            post(content::create_consultation).get(content::list_consultations),
        )
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(addresses::create))
        .route("/{id}", put(addresses::update))
        .route("/user/{user_id}", get(addresses::by_user))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::order_list))
        .route("/initiate", post(payments::initiate))
        .route("/response", post(payments::gateway_response))
        .route("/cancelled", post(payments::cancelled))
        .route("/refund", post(payments::refund))
        .route("/{order_number}", get(payments::order_status))
}

/// Assemble all API routes under `/api`.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .nest("/coupons", coupon_routes())
        .nest("/analytics", analytics_routes())
        .nest("/addresses", address_routes())
        .nest("/payments", payment_routes())
        .route("/reviews/{id}", delete(reviews::remove))
        .route("/shipping/track", post(shipping::track))
        .merge(content_routes());

    Router::new().nest("/api", api)
}
