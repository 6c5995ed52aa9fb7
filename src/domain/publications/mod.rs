pub mod publication;
