// GELF adapter — forwards container log records as GELF messages.

// Core infrastructure
pub mod boot;
pub mod conf;
pub mod identity;

// Domain modules
pub mod adapter;
pub mod fields;
pub mod message;
pub mod udp;
pub mod writer;
