pub mod bank_controller;
