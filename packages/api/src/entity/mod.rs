pub mod commission;
pub mod coupon;
pub mod image;
pub mod order;
pub mod order_item;
pub mod product;
pub mod sea_orm_active_enums;
pub mod tracking_entry;
pub mod user;

pub mod prelude {
    pub use super::commission::Entity as Commission;
    pub use super::coupon::Entity as Coupon;
    pub use super::image::Entity as Image;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::product::Entity as Product;
    pub use super::tracking_entry::Entity as TrackingEntry;
    pub use super::user::Entity as User;
}
