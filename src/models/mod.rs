pub mod applicationmodel;
pub mod jobmodel;
pub mod paymentmodel;
pub mod ratingmodel;
pub mod usermodel;
