//! Module for the boring formatting stuff of all the components

use crate::cache::SetAssociativeCache;

pub trait Draw {
    fn draw(&self) -> String;
}

impl Draw for SetAssociativeCache {
    fn draw(&self) -> String {
        let mut empty = true;
        let mut buf = String::new();

        for (i, set) in self.sets().enumerate() {
            if !set.has_entry() {
                continue;
            }
            empty = false;

            buf += &format!("{i:03}:");
            for line in set.lines().iter().filter(|l| l.is_valid()) {
                let block = self.block_address(i, line.tag());
                buf += &format!(" [{block} c={}]", line.counter());
            }
            buf += "\n";
        }

        if empty {
            buf += "(empty)";
        }

        buf
    }
}
