pub mod constants;
pub mod state;
pub mod random;
pub mod systems;
pub mod game_loop;
pub mod scheduler;
pub mod controller;
pub mod input_buffer;
pub mod match_result;
pub mod runner;
