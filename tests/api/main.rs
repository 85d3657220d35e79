// all api tests are bundled in one binary: each tests/*.rs file would be
// linked separately, and linking is sequential
mod health_check;
mod helpers;
