//! # Sets with structural equality

#![warn(clippy::pedantic)]

use valset::{ops, set};

fn main() -> valset::Result<()> {
    let a = set![1, 2, set![3]];
    let b = set![set![3], 2, 4];
    let c = &a * &b;
    let d = ops::difference(&[set![1, 2], set![1, 3], set![1, 2, 3, 4]])?;

    println!("A:     {a}\nB:     {b}\nA ∩ B: {c}\nΔ:     {d}");
    println!("𝒫(A):  {}", a.power());
    Ok(())
}
