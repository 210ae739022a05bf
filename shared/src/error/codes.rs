//! Unified error codes for the grocery store
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order lifecycle errors
//! - 5xxx: Cart / checkout errors
//! - 6xxx: Catalog errors (products, categories, banners)
//! - 7xxx: Account errors (profiles, addresses)
//! - 8xxx: Rider errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can branch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from the same client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Password too short
    PasswordTooShort = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Rider role required
    RiderRequired = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition not allowed from the current status
    InvalidStatusTransition = 4002,
    /// Order is delivered or cancelled and can no longer change
    OrderFinalized = 4003,
    /// Order was modified concurrently (version mismatch)
    OrderVersionConflict = 4004,
    /// Order is not assigned to the acting rider
    OrderNotAssignedToRider = 4005,
    /// Order is already assigned to another rider
    OrderAlreadyAssigned = 4006,

    // ==================== 5xxx: Checkout ====================
    /// Cart has no items
    CartEmpty = 5001,
    /// Not enough stock for a line
    InsufficientStock = 5002,
    /// Product is inactive or missing
    ProductUnavailable = 5003,
    /// Quantity must be positive
    InvalidQuantity = 5004,
    /// Delivery address missing or incomplete
    DeliveryAddressRequired = 5005,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6002,
    /// Category slug already used
    CategorySlugExists = 6003,
    /// Category still referenced by products
    CategoryHasProducts = 6004,
    /// Banner not found
    BannerNotFound = 6005,
    /// Price is negative or sale price exceeds price
    InvalidPrice = 6006,

    // ==================== 7xxx: Account ====================
    /// Address not found
    AddressNotFound = 7001,
    /// Profile not found
    ProfileNotFound = 7002,
    /// Email already registered
    EmailAlreadyRegistered = 7003,

    // ==================== 8xxx: Rider ====================
    /// Rider not found
    RiderNotFound = 8001,
    /// Profile exists but does not have the rider role
    NotARider = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Request timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::PasswordTooShort => "Password is too short",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role required",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::RiderRequired => "Rider role required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidStatusTransition => "Order status transition is not allowed",
            ErrorCode::OrderFinalized => "Order is already delivered or cancelled",
            ErrorCode::OrderVersionConflict => "Order was modified by someone else",
            ErrorCode::OrderNotAssignedToRider => "Order is not assigned to this rider",
            ErrorCode::OrderAlreadyAssigned => "Order is already assigned to another rider",

            // Checkout
            ErrorCode::CartEmpty => "Your cart is empty",
            ErrorCode::InsufficientStock => "Not enough stock",
            ErrorCode::ProductUnavailable => "Product is not available",
            ErrorCode::InvalidQuantity => "Quantity must be positive",
            ErrorCode::DeliveryAddressRequired => "Delivery address is required",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategorySlugExists => "Category slug already exists",
            ErrorCode::CategoryHasProducts => "Category still has products",
            ErrorCode::BannerNotFound => "Banner not found",
            ErrorCode::InvalidPrice => "Invalid price",

            // Account
            ErrorCode::AddressNotFound => "Address not found",
            ErrorCode::ProfileNotFound => "Profile not found",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",

            // Rider
            ErrorCode::RiderNotFound => "Rider not found",
            ErrorCode::NotARider => "Profile is not a rider",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Request timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::RiderRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidStatusTransition),
            4003 => Ok(ErrorCode::OrderFinalized),
            4004 => Ok(ErrorCode::OrderVersionConflict),
            4005 => Ok(ErrorCode::OrderNotAssignedToRider),
            4006 => Ok(ErrorCode::OrderAlreadyAssigned),

            // Checkout
            5001 => Ok(ErrorCode::CartEmpty),
            5002 => Ok(ErrorCode::InsufficientStock),
            5003 => Ok(ErrorCode::ProductUnavailable),
            5004 => Ok(ErrorCode::InvalidQuantity),
            5005 => Ok(ErrorCode::DeliveryAddressRequired),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::CategoryNotFound),
            6003 => Ok(ErrorCode::CategorySlugExists),
            6004 => Ok(ErrorCode::CategoryHasProducts),
            6005 => Ok(ErrorCode::BannerNotFound),
            6006 => Ok(ErrorCode::InvalidPrice),

            // Account
            7001 => Ok(ErrorCode::AddressNotFound),
            7002 => Ok(ErrorCode::ProfileNotFound),
            7003 => Ok(ErrorCode::EmailAlreadyRegistered),

            // Rider
            8001 => Ok(ErrorCode::RiderNotFound),
            8002 => Ok(ErrorCode::NotARider),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
