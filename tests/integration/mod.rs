mod party_session_tests;
mod riddle_session_tests;
