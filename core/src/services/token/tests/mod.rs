mod revocation_tests;
mod storage_tests;
