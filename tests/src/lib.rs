#![cfg(test)]

mod fixtures;

mod create;
mod guards;
mod update;
