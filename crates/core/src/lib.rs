pub mod attachment;
pub mod clock;
pub mod error;
pub mod field_value;
pub mod ids;
pub mod list_item;
pub mod notice;
pub mod payment;

pub use attachment::ImageAttachment;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CoreError;
pub use field_value::{FieldValue, Snapshot, snapshot};
pub use ids::*;
pub use list_item::{ListItem, decode_items, encode_items, next_item_id};
pub use notice::{Notice, NoticeVariant, Notifier};
pub use payment::{PaymentStatus, PaymentSummary, parse_amount};
