use serde::{Deserialize, Serialize};

use crate::functions::FunctionName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    Walking,
    #[default]
    Driving,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Walking,
        TravelMode::Driving,
        TravelMode::Bicycling,
        TravelMode::Transit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "WALKING",
            Self::Driving => "DRIVING",
            Self::Bicycling => "BICYCLING",
            Self::Transit => "TRANSIT",
        }
    }
}

macro_rules! place_types {
    ($($variant:ident => $name:literal,)+) => {
        /// Closed vocabulary of place categories a nearby search may ask for.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum PlaceType {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl PlaceType {
            pub const ALL: &'static [PlaceType] = &[$(PlaceType::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(PlaceType::$variant => $name,)+
                }
            }
        }
    };
}

place_types! {
    Accounting => "accounting",
    Airport => "airport",
    AmusementPark => "amusement_park",
    Aquarium => "aquarium",
    ArtGallery => "art_gallery",
    Atm => "atm",
    Bakery => "bakery",
    Bank => "bank",
    Bar => "bar",
    BeautySalon => "beauty_salon",
    BicycleStore => "bicycle_store",
    BookStore => "book_store",
    BowlingAlley => "bowling_alley",
    BusStation => "bus_station",
    Cafe => "cafe",
    Campground => "campground",
    CarDealer => "car_dealer",
    CarRental => "car_rental",
    CarRepair => "car_repair",
    CarWash => "car_wash",
    Casino => "casino",
    Cemetery => "cemetery",
    Church => "church",
    CityHall => "city_hall",
    ClothingStore => "clothing_store",
    ConvenienceStore => "convenience_store",
    Courthouse => "courthouse",
    Dentist => "dentist",
    DepartmentStore => "department_store",
    Doctor => "doctor",
    Drugstore => "drugstore",
    Electrician => "electrician",
    ElectronicsStore => "electronics_store",
    Embassy => "embassy",
    FireStation => "fire_station",
    Florist => "florist",
    FuneralHome => "funeral_home",
    FurnitureStore => "furniture_store",
    GasStation => "gas_station",
    Gym => "gym",
    HairCare => "hair_care",
    HardwareStore => "hardware_store",
    HinduTemple => "hindu_temple",
    HomeGoodsStore => "home_goods_store",
    Hospital => "hospital",
    InsuranceAgency => "insurance_agency",
    JewelryStore => "jewelry_store",
    Laundry => "laundry",
    Lawyer => "lawyer",
    Library => "library",
    LightRailStation => "light_rail_station",
    LiquorStore => "liquor_store",
    LocalGovernmentOffice => "local_government_office",
    Locksmith => "locksmith",
    Lodging => "lodging",
    MealDelivery => "meal_delivery",
    MealTakeaway => "meal_takeaway",
    Mosque => "mosque",
    MovieRental => "movie_rental",
    MovieTheater => "movie_theater",
    MovingCompany => "moving_company",
    Museum => "museum",
    NightClub => "night_club",
    Painter => "painter",
    Park => "park",
    Parking => "parking",
    PetStore => "pet_store",
    Pharmacy => "pharmacy",
    Physiotherapist => "physiotherapist",
    Plumber => "plumber",
    Police => "police",
    PostOffice => "post_office",
    PrimarySchool => "primary_school",
    RealEstateAgency => "real_estate_agency",
    Restaurant => "restaurant",
    RoofingContractor => "roofing_contractor",
    RvPark => "rv_park",
    School => "school",
    SecondarySchool => "secondary_school",
    ShoeStore => "shoe_store",
    ShoppingMall => "shopping_mall",
    Spa => "spa",
    Stadium => "stadium",
    Storage => "storage",
    Store => "store",
    SubwayStation => "subway_station",
    Supermarket => "supermarket",
    Synagogue => "synagogue",
    TaxiStand => "taxi_stand",
    TouristAttraction => "tourist_attraction",
    TrainStation => "train_station",
    TransitStation => "transit_station",
    TravelAgency => "travel_agency",
    University => "university",
    VeterinaryCare => "veterinary_care",
    Zoo => "zoo",
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvalidQuery {
    pub valid: bool,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
    pub travel_mode: TravelMode,
    pub with_distance: bool,
    pub with_traffic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NearbyRequest {
    pub location: String,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
}

/// Structured action chosen by the completion model for a free-text query.
///
/// On the wire the selected function's arguments are flattened next to a
/// `functionName` tag, e.g. `{"functionName":"findNearby","location":"Oslo","type":"cafe"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "functionName")]
pub enum InterpretationResult {
    #[serde(rename = "invalidFunction")]
    Invalid(InvalidQuery),
    #[serde(rename = "findRoute")]
    Route(RouteRequest),
    #[serde(rename = "findNearby")]
    Nearby(NearbyRequest),
}

impl InterpretationResult {
    pub fn function_name(&self) -> FunctionName {
        match self {
            Self::Invalid(_) => FunctionName::Invalid,
            Self::Route(_) => FunctionName::FindRoute,
            Self::Nearby(_) => FunctionName::FindNearby,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretRequest {
    #[serde(rename = "textQuery")]
    pub text_query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub user_input: String,
    /// JSON document produced by the mapping API, already serialised by the caller.
    pub location_response: String,
}
