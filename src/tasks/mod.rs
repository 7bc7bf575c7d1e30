pub mod session_loop;
