#![cfg(test)]
mod reset;
mod status;
mod support;
