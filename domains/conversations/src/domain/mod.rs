//! Conversations domain layer: entities and turn vocabulary

pub mod entities;
