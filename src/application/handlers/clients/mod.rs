//! Client and respondent handlers.

mod create_client;
mod create_respondent;
mod queries;

pub use create_client::{CreateClientCommand, CreateClientHandler};
pub use create_respondent::{
    CreateRespondentCommand, CreateRespondentHandler, MIN_SECRET_LEN,
};
pub use queries::{ClientDetail, ClientQueries};
