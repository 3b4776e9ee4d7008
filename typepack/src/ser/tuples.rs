// (c) 2025 Ross Younger

//! Serializers for tuples
//!
//! Tuples travel as arrays of their items, in positional order. A wire
//! array carrying fewer items than the tuple has slots applies the
//! context's tuple-item nil policy to the missing trailing slots; extra
//! items are skipped.

use std::sync::Arc;

use super::{NilImplication, Packable, Serializer};
use crate::context::SerializationContext;
use crate::errors::{Error, Result};
use crate::wire::{Packer, Unpacker};

macro_rules! tuple_serializer {
    ($ser:ident, $len:literal, $( $idx:tt => $t:ident / $f:ident ),+) => {
        struct $ser<$($t),+> {
            $( $f: Arc<dyn Serializer<Item = $t>>, )+
            item_nil: NilImplication,
        }

        impl<$($t: Send + Sync),+> Serializer for $ser<$($t),+> {
            type Item = ($($t,)+);

            fn pack_core(&self, packer: &mut Packer<'_>, value: &Self::Item) -> Result<()> {
                packer.pack_array_header($len)?;
                $( self.$f.pack_to(packer, &value.$idx)?; )+
                Ok(())
            }

            fn unpack_core(&self, unpacker: &mut Unpacker<'_>) -> Result<Self::Item> {
                if !unpacker.is_array_header() {
                    let actual = if unpacker.is_map_header() {
                        "map header"
                    } else {
                        unpacker.last_value().map_or("nothing", |v| v.type_name())
                    };
                    return Err(Error::MessageTypeMismatch {
                        expected: "array header",
                        actual,
                    });
                }
                let count = unpacker.items_count()?;
                let mut consumed = 0usize;
                $(
                    let $f = if consumed < count {
                        unpacker.move_to_next_entry()?;
                        consumed += 1;
                        if unpacker.last_is_nil()
                            && self.item_nil == NilImplication::Prohibit
                        {
                            return Err(Error::MissingRequiredValue("tuple item"));
                        }
                        self.$f.unpack_from(unpacker)?
                    } else {
                        // Missing trailing item: Null (and MemberDefault)
                        // resolve to the item's nil value.
                        self.$f.nil_value().ok_or_else(|| {
                            Error::ValueCannotBeNull(std::any::type_name::<$t>())
                        })?
                    };
                )+
                for _ in consumed..count {
                    unpacker.skip()?;
                }
                Ok(($($f,)+))
            }
        }

        impl<$($t: Packable),+> Packable for ($($t,)+) {
            fn build_serializer(
                context: &Arc<SerializationContext>,
            ) -> Result<Arc<dyn Serializer<Item = Self>>> {
                Ok(Arc::new($ser {
                    $( $f: context.get_serializer::<$t>()?, )+
                    item_nil: context.options().tuple_item_nil,
                }))
            }
        }
    };
}

tuple_serializer!(Tuple2Serializer, 2, 0 => A / a, 1 => B / b);
tuple_serializer!(Tuple3Serializer, 3, 0 => A / a, 1 => B / b, 2 => C / c);
tuple_serializer!(Tuple4Serializer, 4, 0 => A / a, 1 => B / b, 2 => C / c, 3 => D / d);
