use rand::Rng;

/// Items that can show up in generated containers and furnace slots.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Item {
    Bread,
    Coal,
    IronIngot,
    GoldNugget,
    Redstone,
    Lapis,
    Rail,
    Torch,
    MelonSeeds,
    NameTag,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ItemStack {
    pub item: Item,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: Item, count: u32) -> Self {
        ItemStack { item, count }
    }
}

/// Reference to a loot table. Opaque to the placement code; only the
/// container population below interprets it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LootTable {
    AbandonedMineshaft,
}

/// Entry: (item, weight, min count, max count). Counts are inclusive.
type LootEntry = (Item, u32, u32, u32);

const ABANDONED_MINESHAFT: &[LootEntry] = &[
    (Item::Bread, 15, 1, 3),
    (Item::Coal, 10, 3, 8),
    (Item::IronIngot, 10, 1, 5),
    (Item::GoldNugget, 5, 2, 6),
    (Item::Redstone, 5, 4, 9),
    (Item::Lapis, 5, 4, 9),
    (Item::Rail, 20, 4, 8),
    (Item::Torch, 15, 1, 16),
    (Item::MelonSeeds, 10, 2, 4),
    (Item::NameTag, 2, 1, 1),
];

/// Rolls the given loot table into a list of item stacks.
///
/// Containers get between 3 and 8 stacks, drawn independently by weight, so
/// duplicate item kinds are possible just like in regular dungeon loot.
pub fn roll<R: Rng + ?Sized>(table: LootTable, rng: &mut R) -> Vec<ItemStack> {
    let entries = match table {
        LootTable::AbandonedMineshaft => ABANDONED_MINESHAFT,
    };
    let total_weight: u32 = entries.iter().map(|(_, weight, _, _)| weight).sum();

    let stacks = rng.gen_range(3..=8);
    let mut loot = Vec::with_capacity(stacks);
    for _ in 0..stacks {
        let mut pick = rng.gen_range(0..total_weight);
        for (item, weight, min, max) in entries {
            if pick < *weight {
                loot.push(ItemStack::new(*item, rng.gen_range(*min..=*max)));
                break;
            }
            pick -= weight;
        }
    }

    loot
}
