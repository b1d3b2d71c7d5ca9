//! Business services: authentication, email delivery, payment gateway and
//! shipping clients, plus the pure pricing/analytics computations.

pub mod analytics;
pub mod auth;
pub mod ccavenue;
pub mod dtdc;
pub mod email;
pub mod pricing;

pub use auth::AuthService;
pub use ccavenue::CcavenueClient;
pub use dtdc::DtdcClient;
pub use email::EmailService;
