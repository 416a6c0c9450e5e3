use crate::export::PdfCapability;
use crate::storage::MacroLog;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub log: Arc<Mutex<MacroLog>>,
    pub pdf: PdfCapability,
}

impl AppState {
    pub fn new(log: MacroLog, pdf: PdfCapability) -> Self {
        Self {
            log: Arc::new(Mutex::new(log)),
            pdf,
        }
    }
}
