//! Bosco Core - Shared domain library.
//!
//! This crate provides the types and business rules used by every Bosco
//! Clothings component:
//! - `storefront` - Public storefront and back-office JSON API
//! - `cli` - Command-line tools for migrations, seeding and reporting
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Pricing, invoice snapshots and cart merging all live here
//! so they can be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails and statuses
//! - [`product`] - Catalog products and their validation
//! - [`cart`] - Session cart with line merging
//! - [`wishlist`] - Session wishlist keyed by product
//! - [`order`] - Orders and shipping-fee pricing
//! - [`invoice`] - Immutable invoice snapshots of priced orders
//! - [`stats`] - View and order counters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod invoice;
pub mod order;
pub mod product;
pub mod stats;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, CartError, CartItem, CartLineKey};
pub use invoice::{Invoice, InvoiceError, InvoiceRecipient};
pub use order::{NewOrder, ORDER_PAGE_SIZE, Order, OrderError, item_price};
pub use product::{MAX_PRODUCT_IMAGES, NewProduct, Product, ProductError};
pub use stats::{ANONYMOUS_VIEWER, OrderStats, ViewCounts};
pub use types::*;
pub use wishlist::{Wishlist, WishlistError, WishlistItem};
