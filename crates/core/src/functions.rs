use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::InterpretError;
use crate::models::{
    InterpretationResult, InvalidQuery, NearbyRequest, PlaceType, RouteRequest, TravelMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionName {
    #[serde(rename = "invalidFunction")]
    Invalid,
    #[serde(rename = "findRoute")]
    FindRoute,
    #[serde(rename = "findNearby")]
    FindNearby,
}

impl FunctionName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalidFunction",
            Self::FindRoute => "findRoute",
            Self::FindNearby => "findNearby",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "invalidFunction" => Some(Self::Invalid),
            "findRoute" => Some(Self::FindRoute),
            "findNearby" => Some(Self::FindNearby),
            _ => None,
        }
    }
}

/// A function selection as returned by the completion API; `arguments` is the raw JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

const INVALID_FUNCTION_DESCRIPTION: &str = "Validate user query. The query is invalid if any of the following conditions are met:
- If user asks for distance around a single location. (Since we support only two different locations)
- If user wants multiple routes and/or compare them. (Since we support only a single route between two locations)
- If user asks for a single nearby place from a location (Since we support only multiple nearby places from a location)
- If user asks for places based on rating/timings/price (Since we support only places based on type from a location)
- If either origin or destination is not specified, infer that query requests for current location and hence is not valid (Since we do not support current location).
- If user is asking for information based on his/her current location (Since we do not support current location)
- If user's query is not related to directions or nearby places";

/// The fixed menu of functions offered to the model. Exactly one must be selected.
pub fn function_definitions() -> Value {
    let travel_modes: Vec<&str> = TravelMode::ALL.iter().map(|mode| mode.as_str()).collect();
    let place_types: Vec<&str> = PlaceType::ALL.iter().map(|kind| kind.as_str()).collect();

    json!([
        {
            "name": FunctionName::Invalid.as_str(),
            "description": INVALID_FUNCTION_DESCRIPTION,
            "parameters": {
                "type": "object",
                "properties": {
                    "valid": {
                        "type": "boolean",
                        "description": "Always false",
                        "enum": [false]
                    },
                    "errorMessage": {
                        "type": "string",
                        "description": "Error message as to why the query is invalid"
                    }
                },
                "required": ["valid", "errorMessage"],
                "additionalProperties": false
            }
        },
        {
            "name": FunctionName::FindRoute.as_str(),
            "description": "Find route between two different locations",
            "parameters": {
                "type": "object",
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "Origin location"
                    },
                    "destination": {
                        "type": "string",
                        "description": "Destination location"
                    },
                    "travelMode": {
                        "type": "string",
                        "description": format!(
                            "Travel mode to use. Defaults to '{}' if none specified",
                            TravelMode::default().as_str()
                        ),
                        "enum": travel_modes
                    },
                    "withDistance": {
                        "type": "boolean",
                        "description": "Defaults to false if user's query does not explicitly request for distance data"
                    },
                    "withTraffic": {
                        "type": "boolean",
                        "description": "Defaults to false if user's query does not explicitly request for traffic data"
                    }
                },
                "required": ["origin", "destination", "travelMode", "withDistance", "withTraffic"],
                "additionalProperties": false
            }
        },
        {
            "name": FunctionName::FindNearby.as_str(),
            "description": "Find nearby places from a given location and type of place to search",
            "parameters": {
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Location from which to search nearby places"
                    },
                    "type": {
                        "type": "string",
                        "description": "Type of place to search nearby",
                        "enum": place_types
                    }
                },
                "required": ["location", "type"],
                "additionalProperties": false
            }
        }
    ])
}

impl InterpretationResult {
    /// Decodes the model's function selection against the schema of the function it named.
    pub fn from_function_call(call: &FunctionCall) -> Result<Self, InterpretError> {
        let function = FunctionName::parse(&call.name)
            .ok_or_else(|| InterpretError::UnknownFunction(call.name.clone()))?;

        match function {
            FunctionName::Invalid => {
                let invalid: InvalidQuery = decode_arguments(function, &call.arguments)?;
                if invalid.valid {
                    return Err(InterpretError::ValidFlagSet);
                }
                Ok(Self::Invalid(invalid))
            }
            FunctionName::FindRoute => {
                decode_arguments::<RouteRequest>(function, &call.arguments).map(Self::Route)
            }
            FunctionName::FindNearby => {
                decode_arguments::<NearbyRequest>(function, &call.arguments).map(Self::Nearby)
            }
        }
    }
}

fn decode_arguments<T: DeserializeOwned>(
    function: FunctionName,
    arguments: &str,
) -> Result<T, InterpretError> {
    serde_json::from_str(arguments).map_err(|source| InterpretError::MalformedArguments {
        function: function.as_str(),
        source,
    })
}
