pub mod reservation;
pub mod restaurant;
pub mod table;
pub mod value_objects;

pub use reservation::Reservation;
pub use restaurant::{OpeningHours, RestaurantConfig};
pub use table::Table;
pub use value_objects::{
    BookingReference, CustomerId, ReservationId, ReservationStatus, RestaurantId, TableId,
    TableLocation, TimeSlot, TimeSpan,
};
