use tracing::{info, warn};

use bridaldesk_core::{Notice, NoticeVariant, Notifier};

/// Notifier that only logs. Used when no UI surface is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let variant = notice.variant.as_str();
        match notice.variant {
            NoticeVariant::Success => {
                info!(variant, title = %notice.title, description = %notice.description, "notice");
            }
            NoticeVariant::Destructive => {
                warn!(variant, title = %notice.title, description = %notice.description, "notice");
            }
        }
    }
}
