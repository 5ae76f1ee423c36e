pub mod booking_service;
pub mod query_service;
pub mod table_service;

pub use booking_service::{CreateReservationCommand, ReservationApplicationService};
pub use query_service::ReservationQueryService;
pub use table_service::{TableApplicationService, TableOverview};
