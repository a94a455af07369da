pub mod error_log;
pub mod firmware;
pub mod health;
pub mod hexdump;
pub mod intel;

pub use self::error_log::{ErrorInformationEntry, ErrorLog, Status};
pub use self::firmware::{FirmwareSlots, Revision};
pub use self::health::{CriticalWarning, HealthInformation};
pub use self::intel::{AdditionalSmart, SmartAttribute, TemperatureStats};
