mod classify_tests;
mod parser_tests;
