mod circuit;
mod equivalence;
mod repository;
