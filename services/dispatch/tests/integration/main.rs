mod batch_test;
mod dispatch_test;
mod helpers;
