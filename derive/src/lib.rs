extern crate proc_macro;

use itertools::izip;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DataEnum, DeriveInput, Fields, GenericParam,
    Generics, Ident, LitStr, Type, Visibility,
};

/// Field attributes parsed from `#[netpack(...)]` annotations
///
/// * `exclude` - The field is never written or read; decoding leaves it at its default value
#[derive(Debug, Default)]
struct FieldAttributes {
    exclude: bool,
}

/// Extract and parse `#[netpack(...)]` attribute values from field attributes
///
/// Unknown options are reported as compile errors at the offending token.
fn get_field_attributes(attrs: &[Attribute]) -> syn::Result<FieldAttributes> {
    let mut parsed = FieldAttributes::default();
    for attr in attrs {
        if !attr.path().is_ident("netpack") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("exclude") {
                parsed.exclude = true;
                Ok(())
            } else {
                Err(meta.error("unknown netpack field attribute, expected `exclude`"))
            }
        })?;
    }
    Ok(parsed)
}

/// A computed member declared on the type with
/// `#[netpack(property(name = "...", ty = T, get = getter, set = setter, exclude))]`
///
/// * `name` - Informational name, defaults to the getter's name
/// * `ty` - Declared type; the getter must return it by value and the setter must accept it
/// * `get` - `fn(&self) -> T`
/// * `set` - Optional `fn(&mut self, T)`. Without it the property is read-only
/// * `exclude` - Keep the property off the wire
struct Property {
    name: LitStr,
    ty: Type,
    get: Ident,
    set: Option<Ident>,
    exclude: bool,
}

/// Collect the type-level property declarations, in declaration order
fn get_properties(attrs: &[Attribute]) -> syn::Result<Vec<Property>> {
    let mut properties = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("netpack") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("property") {
                return Err(meta.error("unknown netpack type attribute, expected `property(...)`"));
            }

            let mut name = None;
            let mut ty = None;
            let mut get = None;
            let mut set = None;
            let mut exclude = false;
            meta.parse_nested_meta(|option| {
                if option.path.is_ident("name") {
                    name = Some(option.value()?.parse::<LitStr>()?);
                } else if option.path.is_ident("ty") {
                    ty = Some(option.value()?.parse::<Type>()?);
                } else if option.path.is_ident("get") {
                    get = Some(option.value()?.parse::<Ident>()?);
                } else if option.path.is_ident("set") {
                    set = Some(option.value()?.parse::<Ident>()?);
                } else if option.path.is_ident("exclude") {
                    exclude = true;
                } else {
                    return Err(option.error(
                        "unknown property option, expected `name`, `ty`, `get`, `set` or `exclude`",
                    ));
                }
                Ok(())
            })?;

            let get = get.ok_or_else(|| meta.error("property requires `get = method`"))?;
            let ty = ty.ok_or_else(|| meta.error("property requires `ty = Type`"))?;
            let name = name.unwrap_or_else(|| LitStr::new(&get.to_string(), get.span()));
            properties.push(Property {
                name,
                ty,
                get,
                set,
                exclude,
            });
            Ok(())
        })?;
    }
    Ok(properties)
}

/// Every type parameter must itself be packable, and `'static` for the descriptor cache
fn add_trait_bounds(mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(netpack::Packer));
            type_param.bounds.push(parse_quote!(netpack::Unpacker));
            type_param.bounds.push(parse_quote!('static));
        }
    }
    generics
}

/// Derive macro for the `Packer` and `Unpacker` traits
///
/// On structs it also implements `Composite`: the wire layout is every field with a visibility
/// modifier, in declaration order, followed by every declared property, in declaration order.
/// Decoding starts from `Default::default()`, so the struct must implement `Default`.
///
/// On fieldless enums it implements `PacketEnum`: each variant is written as its discriminant,
/// narrowed to one byte.
///
/// # Supported Attributes
///
/// * `#[netpack(exclude)]` - On a field: never serialize it
/// * `#[netpack(property(...))]` - On the struct: declare a getter/setter member
///
/// # Examples
///
/// ```ignore
/// #[derive(Packet, Default)]
/// #[netpack(property(name = "speed", ty = f32, get = speed, set = set_speed))]
/// struct Mover {
///     pub position: Vector2,
///     #[netpack(exclude)]
///     pub local_only: u64,
///     velocity: Vector2,
/// }
///
/// #[derive(Packet, Clone, Copy)]
/// enum Facing {
///     North = 0,
///     South = 2,
/// }
/// ```
#[proc_macro_derive(Packet, attributes(netpack))]
pub fn derive_packet(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = match &input.data {
        Data::Struct(s) => expand_struct(&input, &s.fields),
        Data::Enum(e) => expand_enum(&input, e),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Packet cannot be derived for unions",
        )),
    };
    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_struct(input: &DeriveInput, fields: &Fields) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();
    let generics = add_trait_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut members = Vec::new();

    for (position, field) in fields.iter().enumerate() {
        let field_attrs = get_field_attributes(&field.attrs)?;

        // Private fields are not part of the wire layout at all.
        if matches!(field.vis, Visibility::Inherited) {
            continue;
        }

        let ordinal = position as u32;
        let ty = &field.ty;
        let ty_name = ty.to_token_stream().to_string();
        let (accessor, member_name) = match &field.ident {
            Some(ident) => (ident.to_token_stream(), ident.to_string()),
            None => (
                syn::Index::from(position).to_token_stream(),
                position.to_string(),
            ),
        };

        if field_attrs.exclude {
            members.push(quote! {
                netpack::FieldDescriptor::excluded(
                    netpack::MemberKind::Field,
                    #ordinal,
                    #member_name,
                    #ty_name,
                )
            });
            continue;
        }

        members.push(quote! {
            netpack::FieldDescriptor::included(
                netpack::MemberKind::Field,
                #ordinal,
                #member_name,
                #ty_name,
                netpack::MemberCodec {
                    shape: <#ty as netpack::Packer>::shape,
                    encode: |this: &Self, writer: &mut netpack::PacketWriter| {
                        netpack::Packer::pack(&this.#accessor, writer)
                    },
                    decode: |this: &mut Self, reader: &mut netpack::PacketReader| {
                        this.#accessor = <#ty as netpack::Unpacker>::unpack(reader)?;
                        ::core::result::Result::Ok(())
                    },
                },
            )
        });
    }

    // Decoding starts from `Default::default()`, which generic structs only have conditionally.
    let mut unpack_generics = generics.clone();
    unpack_generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(#name #ty_generics: ::core::default::Default));
    let (_, _, unpack_where_clause) = unpack_generics.split_for_impl();

    let properties = get_properties(&input.attrs)?;
    let ordinals = 0..properties.len() as u32;
    for (ordinal, property, ty_name) in izip!(
        ordinals,
        &properties,
        properties.iter().map(|p| p.ty.to_token_stream().to_string())
    ) {
        let Property {
            name: property_name,
            ty,
            get,
            set,
            exclude,
        } = property;

        if *exclude {
            members.push(quote! {
                netpack::FieldDescriptor::excluded(
                    netpack::MemberKind::Property,
                    #ordinal,
                    #property_name,
                    #ty_name,
                )
            });
            continue;
        }

        let decode = match set {
            Some(set) => quote! {
                |this: &mut Self, reader: &mut netpack::PacketReader| {
                    let value = <#ty as netpack::Unpacker>::unpack(reader)?;
                    this.#set(value);
                    ::core::result::Result::Ok(())
                }
            },
            // Read-only: consume the value to stay aligned, then drop it.
            None => quote! {
                |_: &mut Self, reader: &mut netpack::PacketReader| {
                    let _: #ty = <#ty as netpack::Unpacker>::unpack(reader)?;
                    ::core::result::Result::Ok(())
                }
            },
        };

        members.push(quote! {
            netpack::FieldDescriptor::included(
                netpack::MemberKind::Property,
                #ordinal,
                #property_name,
                #ty_name,
                netpack::MemberCodec {
                    shape: <#ty as netpack::Packer>::shape,
                    encode: |this: &Self, writer: &mut netpack::PacketWriter| {
                        let value: #ty = this.#get();
                        netpack::Packer::pack(&value, writer)
                    },
                    decode: #decode,
                },
            )
        });
    }

    Ok(quote! {
        impl #impl_generics netpack::Composite for #name #ty_generics #where_clause {
            fn describe() -> netpack::TypeDescriptor<Self> {
                netpack::TypeDescriptor::new(#type_name, ::std::vec![#(#members),*])
            }
        }

        impl #impl_generics netpack::Packer for #name #ty_generics #where_clause {
            fn shape() -> netpack::Shape {
                netpack::composite::composite_shape::<Self>()
            }

            fn pack(&self, writer: &mut netpack::PacketWriter) -> netpack::Result<()> {
                netpack::composite::pack_composite(self, writer)
            }
        }

        impl #impl_generics netpack::Unpacker for #name #ty_generics #unpack_where_clause {
            fn unpack(reader: &mut netpack::PacketReader) -> netpack::Result<Self> {
                netpack::composite::unpack_composite(reader)
            }
        }
    })
}

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut discriminant_arms = Vec::new();
    let mut lookups = Vec::new();
    for v in &data.variants {
        if !matches!(v.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                v,
                "Packet enums must be fieldless; carry data in a struct field instead",
            ));
        }
        let variant_ident = &v.ident;
        discriminant_arms.push(quote! {
            #name::#variant_ident => #name::#variant_ident as i64,
        });
        lookups.push(quote! {
            if value == #name::#variant_ident as i64 {
                return ::core::option::Option::Some(#name::#variant_ident);
            }
        });
    }

    Ok(quote! {
        impl #impl_generics netpack::PacketEnum for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            fn discriminant(&self) -> i64 {
                match *self {
                    #(#discriminant_arms)*
                }
            }

            fn from_discriminant(value: i64) -> ::core::option::Option<Self> {
                #(#lookups)*
                ::core::option::Option::None
            }
        }

        impl #impl_generics netpack::Packer for #name #ty_generics #where_clause {
            fn shape() -> netpack::Shape {
                netpack::enums::enum_shape::<Self>()
            }

            fn pack(&self, writer: &mut netpack::PacketWriter) -> netpack::Result<()> {
                netpack::enums::pack_enum(self, writer)
            }
        }

        impl #impl_generics netpack::Unpacker for #name #ty_generics #where_clause {
            fn unpack(reader: &mut netpack::PacketReader) -> netpack::Result<Self> {
                netpack::enums::unpack_enum(reader)
            }
        }
    })
}
