mod helpers;
mod product_test;
