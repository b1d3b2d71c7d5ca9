//! Domain models shared between repositories and route handlers.

pub mod ad;
pub mod address;
pub mod analytics;
pub mod cart;
pub mod category;
pub mod content;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use ad::Ad;
pub use address::Address;
pub use analytics::{
    AnalyticsSnapshot, ChartPoint, OrderStatusSummary, RangeSummary, TopSeller, TrendPoint,
};
pub use cart::{CartItem, SharedCart, SharedCartItem};
pub use category::{Category, CategoryWithCount};
pub use content::{Brochure, Consultation, Essentials, EssentialsCard, Policy, PolicyVersion, Shelf};
pub use coupon::Coupon;
pub use order::{Order, OrderItem, ShippingAddress};
pub use product::{Product, ProductContent};
pub use review::Review;
pub use user::{ProfileCounts, User, UserSummary};
