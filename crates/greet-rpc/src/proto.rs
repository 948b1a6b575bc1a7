//! Messages of the `greet` protobuf package.
//!
//! ```text
//! syntax = "proto3";
//! package greet;
//!
//! message Greeting {
//!     string first_name = 1;
//!     string last_name = 2;
//! }
//!
//! message GreetRequest { Greeting greeting = 1; }
//! message GreetResponse { string result = 1; }
//!
//! service GreetService {
//!     rpc Greet(GreetRequest) returns (GreetResponse) {};
//!     rpc GreetManyTimes(GreetManyTimesRequest) returns (stream GreetManyTimesResponse) {};
//!     rpc LongGreet(stream LongGreetRequest) returns (LongGreetResponse) {};
//!     rpc GreetEveryone(stream GreetEveryoneRequest) returns (stream GreetEveryoneResponse) {};
//!     rpc GreetWithDeadline(GreetWithDeadlineRequest) returns (GreetWithDeadlineResponse) {};
//! }
//! ```
//!
//! Every other request wraps a `Greeting` at tag 1 and every other response
//! carries a `result` string at tag 1.

/// A person to greet.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Greeting {
    /// First name of the person.
    #[prost(string, tag = "1")]
    pub first_name: ::prost::alloc::string::String,
    /// Last name of the person.
    #[prost(string, tag = "2")]
    pub last_name: ::prost::alloc::string::String,
}

impl Greeting {
    /// Create a greeting for the given names. Names are not validated.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

macro_rules! greeting_request {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct $name {
                /// The person to greet.
                #[prost(message, optional, tag = "1")]
                pub greeting: ::core::option::Option<Greeting>,
            }

            impl From<Greeting> for $name {
                fn from(greeting: Greeting) -> Self {
                    Self {
                        greeting: Some(greeting),
                    }
                }
            }
        )+
    };
}

macro_rules! result_response {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct $name {
                /// The greeting produced by the service.
                #[prost(string, tag = "1")]
                pub result: ::prost::alloc::string::String,
            }

            impl $name {
                /// Create a response carrying the given result.
                pub fn new(result: impl Into<String>) -> Self {
                    Self {
                        result: result.into(),
                    }
                }
            }
        )+
    };
}

greeting_request! {
    /// Request of `GreetService.Greet`.
    GreetRequest,
    /// Request of `GreetService.GreetManyTimes`.
    GreetManyTimesRequest,
    /// One request message of `GreetService.LongGreet`.
    LongGreetRequest,
    /// One request message of `GreetService.GreetEveryone`.
    GreetEveryoneRequest,
    /// Request of `GreetService.GreetWithDeadline`.
    GreetWithDeadlineRequest,
}

result_response! {
    /// Response of `GreetService.Greet`.
    GreetResponse,
    /// One response message of `GreetService.GreetManyTimes`.
    GreetManyTimesResponse,
    /// Response of `GreetService.LongGreet`.
    LongGreetResponse,
    /// One response message of `GreetService.GreetEveryone`.
    GreetEveryoneResponse,
    /// Response of `GreetService.GreetWithDeadline`.
    GreetWithDeadlineResponse,
}
