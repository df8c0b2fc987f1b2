pub mod restore_service;
