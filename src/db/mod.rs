pub mod applicationdb;
pub mod db;
pub mod error;
pub mod jobdb;
#[cfg(test)]
pub mod memorydb;
pub mod paymentdb;
pub mod ratingdb;
#[cfg(test)]
pub mod testkit;
pub mod userdb;

use applicationdb::ApplicationExt;
use jobdb::JobExt;
use paymentdb::PaymentExt;
use ratingdb::RatingExt;
use userdb::UserExt;

/// Everything the lifecycle managers need from storage.
pub trait MarketStore:
    UserExt + JobExt + ApplicationExt + PaymentExt + RatingExt + std::fmt::Debug + Send + Sync
{
}

impl<T> MarketStore for T where
    T: UserExt + JobExt + ApplicationExt + PaymentExt + RatingExt + std::fmt::Debug + Send + Sync
{
}
