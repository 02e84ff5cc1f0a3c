mod log_delivery;

pub use log_delivery::LogOtpDelivery;
