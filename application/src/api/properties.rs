//! [`Property`] and [`Room`] endpoints.
//!
//! [`Property`]: service::domain::Property
//! [`Room`]: service::domain::Room

use axum::{
    extract::{Path, Query as UrlQuery},
    routing::{get, post},
    Extension, Json, Router,
};
use common::{money::Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::{property, room, Property, Room},
    query::{self, Query as _},
    read,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Error, Service, Session};

/// Builds the [`Router`] of the property endpoints.
#[must_use]
pub(super) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(by_id))
        .route("/:id/rooms", get(rooms).post(add_room))
}

/// [`Property`] representation of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDto {
    /// ID of the property.
    pub id: property::Id,

    /// Name of the property.
    pub name: String,

    /// URL slug of the property.
    pub slug: String,

    /// Description of the property.
    pub description: String,

    /// Kind of the property.
    pub kind: property::Kind,

    /// Gender policy of the property.
    pub gender: property::GenderPolicy,

    /// Location of the property.
    pub location: LocationDto,

    /// Amenities of the property.
    pub amenities: Vec<property::Amenity>,

    /// House rules of the property.
    pub rules: Vec<String>,

    /// Pricing summary of the property.
    pub pricing: PricingDto,

    /// Average rating over non-flagged reviews.
    pub avg_rating: Decimal,

    /// Count of non-flagged reviews.
    pub total_reviews: i32,

    /// Count of rooms of the property.
    pub total_rooms: i32,

    /// Count of rooms with at least one available bed.
    pub available_rooms: i32,

    /// Indicator whether the property is verified.
    pub verified: bool,

    /// Indicator whether the property is featured.
    pub featured: bool,

    /// Creation time of the property, RFC 3339.
    pub created_at: String,
}

/// Location part of a [`PropertyDto`].
#[derive(Debug, Serialize)]
pub struct LocationDto {
    /// Street address.
    pub address: String,

    /// City.
    pub city: String,

    /// State.
    pub state: String,

    /// Postal code.
    pub pincode: String,

    /// Latitude, if known.
    pub lat: Option<Decimal>,

    /// Longitude, if known.
    pub lng: Option<Decimal>,
}

/// Pricing part of a [`PropertyDto`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDto {
    /// Lowest daily room rate, in rupees.
    pub starting_from: Decimal,

    /// Security deposit, in rupees.
    pub security_deposit: Decimal,
}

impl From<Property> for PropertyDto {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            name: p.name.to_string(),
            slug: p.slug.to_string(),
            description: p.description.to_string(),
            kind: p.kind,
            gender: p.gender,
            location: LocationDto {
                address: p.location.address.to_string(),
                city: p.location.city.to_string(),
                state: p.location.state.to_string(),
                pincode: p.location.pincode.to_string(),
                lat: p.location.coordinates.map(|c| c.lat),
                lng: p.location.coordinates.map(|c| c.lng),
            },
            amenities: p.amenities,
            rules: p.rules.iter().map(ToString::to_string).collect(),
            pricing: PricingDto {
                starting_from: p.pricing.starting_from.amount,
                security_deposit: p.pricing.security_deposit.amount,
            },
            avg_rating: p.avg_rating.into(),
            total_reviews: p.total_reviews,
            total_rooms: p.total_rooms,
            available_rooms: p.available_rooms,
            verified: p.verified,
            featured: p.featured,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// [`Room`] representation of the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    /// ID of the room.
    pub id: room::Id,

    /// ID of the owning property.
    pub property_id: property::Id,

    /// Name of the room.
    pub name: String,

    /// Kind of the room.
    pub kind: room::Kind,

    /// Price of the room per period, in rupees.
    pub price: PriceDto,

    /// Guest capacity of the room.
    pub capacity: u16,

    /// Total number of beds.
    pub total_beds: u16,

    /// Number of beds currently available.
    pub available_beds: u16,

    /// Indicator whether the room is air-conditioned.
    pub ac: bool,

    /// Indicator whether the room has an attached bathroom.
    pub attached_bathroom: bool,

    /// Indicator whether the room is bookable.
    pub active: bool,
}

/// Price part of a [`RoomDto`].
#[derive(Debug, Serialize)]
pub struct PriceDto {
    /// Daily rate, in rupees.
    pub daily: Decimal,

    /// Weekly rate, in rupees, if offered.
    pub weekly: Option<Decimal>,

    /// Monthly rate, in rupees, if offered.
    pub monthly: Option<Decimal>,
}

impl From<Room> for RoomDto {
    fn from(r: Room) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            name: r.name.to_string(),
            kind: r.kind,
            price: PriceDto {
                daily: r.price.daily.amount,
                weekly: r.price.weekly.map(|m| m.amount),
                monthly: r.price.monthly.map(|m| m.amount),
            },
            capacity: r.capacity,
            total_beds: r.total_beds,
            available_beds: r.available_beds,
            ac: r.ac,
            attached_bathroom: r.attached_bathroom,
            active: r.active,
        }
    }
}

/// Filters of the `GET /properties` request.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    /// City to list properties in.
    city: Option<String>,

    /// Kind to list properties of.
    kind: Option<property::Kind>,

    /// 1-based number of the requested page.
    page: Option<usize>,

    /// Number of items per page.
    limit: Option<usize>,
}

/// Lists active, verified properties.
#[tracing::instrument(skip_all, fields(http.name = "listProperties"))]
async fn list(
    Extension(service): Extension<Service>,
    UrlQuery(q): UrlQuery<ListQuery>,
) -> Result<Json<serde_json::Value>, Error> {
    let city = q
        .city
        .map(|c| {
            property::City::new(c)
                .ok_or_else(|| Error::invalid_input("invalid `city`"))
        })
        .transpose()?;

    let page = service
        .execute(query::properties::List::by(
            read::property::list::Selector {
                arguments: api::PageQuery {
                    page: q.page,
                    limit: q.limit,
                }
                .arguments(),
                filter: read::property::list::Filter { city, kind: q.kind },
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    let meta = api::PageMeta::from(&page);
    let properties = page
        .items
        .into_iter()
        .map(PropertyDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "properties": properties,
        "pagination": meta,
    })))
}

/// Returns a single [`Property`] by its ID or URL slug.
#[tracing::instrument(skip_all, fields(http.name = "propertyById", id = %id))]
async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Error> {
    let property = if let Ok(id) = id.parse::<Uuid>() {
        service
            .execute(query::property::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)?
    } else {
        let slug = id
            .parse::<property::Slug>()
            .map_err(|_| Error::from(api::NotFoundError::NotFound))?;
        service
            .execute(query::property::BySlug::by(&slug))
            .await
            .map_err(AsError::into_error)?
    }
    .ok_or_else(|| Error::from(api::NotFoundError::NotFound))?;

    Ok(Json(json!({
        "success": true,
        "property": PropertyDto::from(property),
    })))
}

/// Body of the `POST /properties` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    /// Name of the new property.
    name: String,

    /// Description of the new property.
    description: String,

    /// Kind of the new property.
    kind: property::Kind,

    /// Gender policy of the new property.
    gender: Option<property::GenderPolicy>,

    /// Street address of the new property.
    address: String,

    /// City of the new property.
    city: String,

    /// State of the new property.
    state: String,

    /// Postal code of the new property.
    pincode: String,

    /// Latitude of the new property.
    lat: Option<Decimal>,

    /// Longitude of the new property.
    lng: Option<Decimal>,

    /// Amenities of the new property.
    #[serde(default)]
    amenities: Vec<property::Amenity>,

    /// House rules of the new property.
    #[serde(default)]
    rules: Vec<String>,

    /// Starting daily rate, in rupees.
    starting_from: Decimal,

    /// Security deposit, in rupees.
    #[serde(default)]
    security_deposit: Decimal,
}

/// Creates a new [`Property`].
#[tracing::instrument(skip_all, fields(http.name = "createProperty"))]
async fn create(
    Extension(service): Extension<Service>,
    session: Session,
    Json(body): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<serde_json::Value>), Error> {
    let name = property::Name::new(body.name)
        .ok_or_else(|| Error::invalid_input("invalid `name`"))?;
    let description = property::Description::new(body.description)
        .ok_or_else(|| Error::invalid_input("invalid `description`"))?;
    let address = property::Address::new(body.address)
        .ok_or_else(|| Error::invalid_input("invalid `address`"))?;
    let city = property::City::new(body.city)
        .ok_or_else(|| Error::invalid_input("invalid `city`"))?;
    let state = property::State::new(body.state)
        .ok_or_else(|| Error::invalid_input("invalid `state`"))?;
    let pincode = property::Pincode::new(body.pincode)
        .ok_or_else(|| Error::invalid_input("invalid `pincode`"))?;
    let rules = body
        .rules
        .into_iter()
        .map(|r| {
            property::Rule::new(r)
                .ok_or_else(|| Error::invalid_input("invalid rule"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let coordinates = match (body.lat, body.lng) {
        (Some(lat), Some(lng)) => Some(property::Coordinates { lat, lng }),
        (None, None) => None,
        (Some(_) | None, _) => {
            return Err(Error::invalid_input(
                "`lat` and `lng` must be provided together",
            ));
        }
    };
    if body.starting_from < Decimal::ZERO
        || body.security_deposit < Decimal::ZERO
    {
        return Err(Error::invalid_input("prices must not be negative"));
    }

    let property = service
        .execute(command::CreateProperty {
            owner_id: session.user_id,
            name,
            description,
            kind: body.kind,
            gender: body.gender.unwrap_or(property::GenderPolicy::Coed),
            location: property::Location {
                address,
                city,
                state,
                pincode,
                coordinates,
            },
            amenities: body.amenities,
            rules,
            starting_from: Money {
                amount: body.starting_from,
                currency: Currency::Inr,
            },
            security_deposit: Money {
                amount: body.security_deposit,
                currency: Currency::Inr,
            },
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(json!({
            "success": true,
            "property": PropertyDto::from(property),
        })),
    ))
}

/// Lists the rooms of a [`Property`].
#[tracing::instrument(skip_all, fields(http.name = "propertyRooms", id = %id))]
async fn rooms(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error> {
    let rooms = service
        .execute(query::rooms::ByProperty::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(RoomDto::from)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "success": true,
        "rooms": rooms,
    })))
}

/// Body of the `POST /properties/{id}/rooms` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddRoomRequest {
    /// Name of the new room.
    name: String,

    /// Kind of the new room.
    kind: room::Kind,

    /// Daily rate, in rupees.
    price_daily: Decimal,

    /// Weekly rate, in rupees.
    price_weekly: Option<Decimal>,

    /// Monthly rate, in rupees.
    price_monthly: Option<Decimal>,

    /// Guest capacity of the new room.
    capacity: u16,

    /// Total number of beds.
    total_beds: u16,

    /// Indicator whether the new room is air-conditioned.
    #[serde(default)]
    ac: bool,

    /// Indicator whether the new room has an attached bathroom.
    #[serde(default)]
    attached_bathroom: bool,
}

/// Adds a [`Room`] to a [`Property`].
#[tracing::instrument(skip_all, fields(http.name = "addRoom", id = %id))]
async fn add_room(
    Extension(service): Extension<Service>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(body): Json<AddRoomRequest>,
) -> Result<(http::StatusCode, Json<serde_json::Value>), Error> {
    let name = room::Name::new(body.name)
        .ok_or_else(|| Error::invalid_input("invalid `name`"))?;
    if body.price_daily <= Decimal::ZERO {
        return Err(Error::invalid_input("`priceDaily` must be positive"));
    }
    if body.capacity == 0 {
        return Err(Error::invalid_input("`capacity` must be at least 1"));
    }

    let money = |amount| Money {
        amount,
        currency: Currency::Inr,
    };
    let room = service
        .execute(command::CreateRoom {
            property_id: id.into(),
            initiator_id: session.user_id,
            initiator_role: session.role,
            name,
            kind: body.kind,
            price: room::Price {
                daily: money(body.price_daily),
                weekly: body.price_weekly.map(money),
                monthly: body.price_monthly.map(money),
            },
            capacity: body.capacity,
            total_beds: body.total_beds,
            ac: body.ac,
            attached_bathroom: body.attached_bathroom,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(json!({
            "success": true,
            "room": RoomDto::from(room),
        })),
    ))
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`User` with the provided ID does not exist"]
                UserNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
            Self::UserNotExists(_) => Error::UserNotExists.into(),
        })
    }
}

impl AsError for command::create_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_BEDS"]
                #[status = BAD_REQUEST]
                #[message = "`Room` must have at least one bed"]
                NoBeds,

                #[code = "PROPERTY_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Property` with the provided ID does not exist"]
                PropertyNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NoBeds => Error::NoBeds.into(),
            Self::NotAllowed(_) => api::PrivilegeError::NotAuthorized.into(),
            Self::PropertyNotExists(_) => Error::PropertyNotExists.into(),
        })
    }
}
