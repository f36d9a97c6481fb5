pub mod coordinates;
pub mod itinerary;
pub mod journey;
pub mod place;
pub mod reward;
pub mod route;
pub mod trip;
pub mod user;

pub use coordinates::Coordinates;
pub use itinerary::{Activity, ActivityType, DayItinerary, Itinerary};
pub use journey::{Journey, JourneyStatus, JourneyStop, VisitOutcome};
pub use place::{Place, PlaceId};
pub use reward::{Redemption, RedemptionStatus, Review, Reward, RewardCategory};
pub use route::{Route, RouteMarker};
pub use trip::{Personality, TripDuration};
pub use user::UserProfile;
