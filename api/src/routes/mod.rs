pub mod ask;
pub mod health_route;
pub mod root_route;
pub mod test_retrieval_route;
