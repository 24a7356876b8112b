mod user_test;
