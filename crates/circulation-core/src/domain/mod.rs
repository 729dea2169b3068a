//! Domain model (ids, status, records, configuration, errors).

pub mod config;
pub mod errors;
pub mod ids;
pub mod record;
pub mod state;

pub use self::config::{CirculationConfig, LifecycleAction, ReturnCheck};
pub use self::errors::{CirculationError, ErrorKind};
pub use self::ids::{RecordId, RecordKind};
pub use self::record::{CIRCULATION_FIELD, Circulation, FieldSnapshot, Record, SCHEMA_FIELD};
pub use self::state::{CirculationStatus, ParseStatusError};
