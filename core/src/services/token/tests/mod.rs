mod keys;

mod signer_tests;
