pub mod clock;
pub mod console_logger;
pub mod event_publisher;
pub mod reservation_repository;
pub mod restaurant_repository;
pub mod table_repository;

pub use clock::SystemClock;
pub use console_logger::ConsoleLogger;
pub use event_publisher::ConsoleEventPublisher;
pub use reservation_repository::MySqlReservationRepository;
pub use restaurant_repository::MySqlRestaurantRepository;
pub use table_repository::MySqlTableRepository;
